use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RenderqError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        RenderqError::missing_object("Camera")
            .to_string()
            .contains("missing object: Camera")
    );
    assert!(
        RenderqError::keyframe("x")
            .to_string()
            .contains("keyframe error:")
    );
    assert!(
        RenderqError::compositor("x")
            .to_string()
            .contains("compositor error:")
    );
    assert!(RenderqError::render("x").to_string().contains("render error:"));
    assert!(RenderqError::undo("x").to_string().contains("undo error:"));
    assert!(
        RenderqError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn io_and_other_preserve_source() {
    let err: RenderqError = std::io::Error::other("disk full").into();
    assert!(err.to_string().contains("disk full"));

    let base = std::io::Error::other("boom");
    let err = RenderqError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
