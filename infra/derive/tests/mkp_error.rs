#[test]
fn mkp_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/mkp_error_pass.rs");
    t.pass("tests/ui/mkp_error_codes.rs");
}
