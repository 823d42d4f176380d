mod test_candidates_forwarded_in_order;
mod test_forward_from_outsider_dropped;
mod test_forward_to_absent_target_dropped;
mod test_offer_forwarded_with_rewritten_sender;
