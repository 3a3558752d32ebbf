use super::*;

#[test]
fn test_parameter_validation() {
    assert!(validate::parameter(true, "window", "out of range").is_ok());

    let err = validate::parameter(false, "window", "out of range").unwrap_err();
    match &err {
        Error::Parameter { name, reason } => {
            assert_eq!(name, "window");
            assert_eq!(reason, "out of range");
        }
        _ => panic!("Expected Parameter error"),
    }
    assert_eq!(err.to_string(), "Invalid parameter 'window': out of range");
}

#[test]
fn test_length_validation() {
    assert!(validate::length("msm inputs", 4, 4).is_ok());

    let err = validate::length("msm inputs", 3, 4).unwrap_err();
    assert_eq!(
        err,
        Error::Length {
            context: "msm inputs",
            expected: 4,
            actual: 3,
        }
    );
    assert_eq!(
        err.to_string(),
        "Invalid length for msm inputs: expected 4, got 3"
    );
}

#[test]
fn test_capacity_validation() {
    assert!(validate::capacity("points", 8, 8).is_ok());

    let err = validate::capacity("points", 9, 8).unwrap_err();
    assert!(matches!(
        err,
        Error::Capacity {
            zone: "points",
            requested: 9,
            available: 8
        }
    ));
}

#[test]
fn test_param_helper_accepts_owned_strings() {
    let err = Error::param(String::from("scalars[3]"), "not reduced modulo the group order");
    assert_eq!(
        err.to_string(),
        "Invalid parameter 'scalars[3]': not reduced modulo the group order"
    );
}
