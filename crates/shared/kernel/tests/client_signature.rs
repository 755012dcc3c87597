use mkp_kernel::security::signature::ClientSignature;

#[test]
fn browser_signature_wins_over_user_agent() {
    let sig = ClientSignature::resolve(Some("fp-123"), Some("Mozilla/5.0"));
    assert_eq!(sig.as_str(), "fp-123");
}

#[test]
fn falls_back_to_user_agent_then_unknown() {
    assert_eq!(ClientSignature::resolve(None, Some("curl/8.0")).as_str(), "curl/8.0");
    assert_eq!(ClientSignature::resolve(Some("  "), Some("curl/8.0")).as_str(), "curl/8.0");
    assert_eq!(ClientSignature::resolve(None, None).as_str(), "unknown");
    assert_eq!(ClientSignature::default().as_str(), "unknown");
}

#[test]
fn header_lookup_is_case_insensitive() {
    let headers = [("User-Agent", "agent/1"), ("X-Browser-Signature", "fp-9")];
    assert_eq!(ClientSignature::from_headers(headers).as_str(), "fp-9");

    let headers = [("USER-AGENT", "agent/2")];
    assert_eq!(ClientSignature::from_headers(headers).to_string(), "agent/2");
}
