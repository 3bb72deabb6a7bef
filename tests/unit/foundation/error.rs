use super::*;

#[test]
fn constructor_helpers_pick_the_right_variant() {
    assert!(matches!(
        ScenereelError::validation("x"),
        ScenereelError::Validation(_)
    ));
    assert!(matches!(ScenereelError::decode("x"), ScenereelError::Decode(_)));
    assert!(matches!(ScenereelError::engine("x"), ScenereelError::Engine(_)));
    assert!(matches!(
        ScenereelError::finalize("x"),
        ScenereelError::Finalize(_)
    ));
}

#[test]
fn fetch_error_display_names_url_and_attempts() {
    let err = ScenereelError::Fetch {
        url: "https://example.test/a.png".to_owned(),
        attempts: 3,
        source: anyhow::anyhow!("connection refused"),
    };
    let msg = err.to_string();
    assert!(msg.contains("https://example.test/a.png"));
    assert!(msg.contains("3 attempts"));
}

#[test]
fn anyhow_errors_convert_transparently() {
    fn inner() -> ScenereelResult<()> {
        Err(anyhow::anyhow!("io went sideways"))?;
        Ok(())
    }
    let msg = inner().unwrap_err().to_string();
    assert!(msg.contains("io went sideways"));
}
