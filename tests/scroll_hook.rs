use trackball_scroll::scroll::{should_ignore_event, INJECT_TAG};

#[test]
fn own_tag_is_ignored() {
    assert!(should_ignore_event(INJECT_TAG));
}

#[test]
fn input_injected_by_other_tools_is_processed() {
    // Remappers inject through SendInput with their own (or no) extra info.
    assert!(!should_ignore_event(0));
    assert!(!should_ignore_event(0x1234));
}
