mod common;

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};
use common::two_mcq_quiz;
use knowlearn_backend::{error::Error, services::share_service::ShareService};

#[test]
fn token_restores_the_whole_quiz() {
    let mut quiz = two_mcq_quiz();
    quiz.title = "Café Physics — 物理学".to_string();

    let token = ShareService::encode(&quiz).expect("encode");
    assert!(token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

    let decoded = ShareService::decode(&token).expect("decode");
    assert_eq!(decoded, quiz);
}

#[test]
fn fractional_points_survive_the_token_exactly() {
    let mut quiz = two_mcq_quiz();
    quiz.questions[0].points = 0.1 + 0.2;
    quiz.questions[1].points = 0.1000123;

    let decoded = ShareService::decode(&ShareService::encode(&quiz).unwrap()).unwrap();
    assert_eq!(decoded.questions[0].points.to_bits(), (0.1f64 + 0.2).to_bits());
    assert_eq!(decoded.questions[1].points.to_bits(), 0.1000123f64.to_bits());

    for step in 1..2000u32 {
        quiz.questions[0].points = f64::from(step) * 0.0001 + 0.000_000_1;
        let decoded = ShareService::decode(&ShareService::encode(&quiz).unwrap()).unwrap();
        assert_eq!(decoded, quiz, "points {}", quiz.questions[0].points);
    }
}

#[test]
fn token_layers_are_standard_then_url_safe_base64() {
    let quiz = two_mcq_quiz();
    let token = ShareService::encode(&quiz).expect("encode");

    let inner = URL_SAFE_NO_PAD.decode(token).expect("outer layer");
    let json = STANDARD.decode(inner).expect("inner layer");
    let value: serde_json::Value = serde_json::from_slice(&json).expect("json");
    assert_eq!(value["id"], "quiz00001");
    assert_eq!(value["settings"]["isReleased"], true);
}

#[test]
fn invalid_base64_is_a_corrupt_link() {
    let err = ShareService::decode("!!!not*base64***").unwrap_err();
    assert!(matches!(err, Error::CorruptShareLink(_)));
    assert_eq!(err.code(), "corrupt_share_link");
}

#[test]
fn valid_base64_of_garbage_is_a_corrupt_link() {
    let not_base64_inside = URL_SAFE_NO_PAD.encode("%%%% definitely not base64");
    assert!(matches!(
        ShareService::decode(&not_base64_inside),
        Err(Error::CorruptShareLink(_))
    ));

    let not_a_quiz = URL_SAFE_NO_PAD.encode(STANDARD.encode(r#"{"hello":"world"}"#));
    assert!(matches!(
        ShareService::decode(&not_a_quiz),
        Err(Error::CorruptShareLink(_))
    ));

    let mut quiz = two_mcq_quiz();
    quiz.id = String::new();
    let empty_id = URL_SAFE_NO_PAD.encode(STANDARD.encode(serde_json::to_string(&quiz).unwrap()));
    assert!(matches!(
        ShareService::decode(&empty_id),
        Err(Error::CorruptShareLink(_))
    ));
}

#[test]
fn share_url_routes_through_the_hash() {
    let quiz = two_mcq_quiz();
    let url = ShareService::share_url("http://localhost:5173", &quiz).expect("url");
    let token = ShareService::encode(&quiz).unwrap();
    assert_eq!(
        url,
        format!("http://localhost:5173/#/quiz/quiz00001?share={}", token)
    );
}
