use axum::{
    body::Body,
    http::{Method, StatusCode},
};
use common::{
    make_config, make_contact_service, make_router, make_static_dir, post_json, request, send,
    get,
};
use pretty_assertions::assert_eq;
use santi_core_contact_contracts::MockContactFeatureService;
use santi_core_health_contracts::MockHealthFeatureService;
use santi_email_contracts::MockEmailService;
use santi_models::environment::Environment;
use serde_json::{json, Value};

mod common;

const MESSAGE: &str = "Vorrei un preventivo per 4 gomme.";

fn valid_form(message: &str) -> Value {
    json!({
        "nome": "Mario Rossi",
        "email": "m.rossi@example.com",
        "messaggio": message,
        "privacy": true,
    })
}

#[tokio::test]
async fn submit_ok() {
    // Arrange
    let static_dir = make_static_dir();
    let mut email = MockEmailService::new();
    email
        .expect_send()
        .once()
        .withf(|email| {
            email.recipient.as_str() == "info@example.com"
                && email.subject == "[Sito Web] Nuovo messaggio da Mario Rossi"
                && email.reply_to == Some("m.rossi@example.com".parse().unwrap())
                && email.body.ends_with("\n\nVorrei un preventivo per 4 gomme.")
        })
        .return_once(|_| Box::pin(std::future::ready(Ok(true))));

    let router = make_router(
        MockHealthFeatureService::new(),
        make_contact_service(email),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    let response = send(&router, post_json("/api/contatti", &valid_form(MESSAGE))).await;

    // Assert
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"success": true, "message": "Messaggio inviato correttamente!"})
    );
}

#[tokio::test]
async fn submit_invalid() {
    // Arrange
    let static_dir = make_static_dir();
    let router = make_router(
        MockHealthFeatureService::new(),
        make_contact_service(MockEmailService::new()),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    let response = send(
        &router,
        post_json(
            "/api/contatti",
            &json!({"nome": "M", "email": "bad", "messaggio": "hi", "privacy": true}),
        ),
    )
    .await;

    // Assert
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({
            "success": false,
            "message": "Il nome deve essere tra 2 e 100 caratteri.",
            "errors": [
                {"field": "nome", "message": "Il nome deve essere tra 2 e 100 caratteri."},
                {"field": "email", "message": "Inserisci un indirizzo email valido."},
                {"field": "messaggio", "message": "Il messaggio deve essere tra 10 e 2000 caratteri."},
            ],
        })
    );
}

#[tokio::test]
async fn submit_missing_fields() {
    // Arrange
    let static_dir = make_static_dir();
    let router = make_router(
        MockHealthFeatureService::new(),
        make_contact_service(MockEmailService::new()),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    let response = send(
        &router,
        post_json("/api/contatti", &json!({"nome": 42, "privacy": true})),
    )
    .await;

    // Assert
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({
            "success": false,
            "message": "Il nome è obbligatorio.",
            "errors": [
                {"field": "nome", "message": "Il nome è obbligatorio."},
                {"field": "email", "message": "L'email è obbligatoria."},
                {"field": "messaggio", "message": "Il messaggio è obbligatorio."},
            ],
        })
    );
}

#[tokio::test]
async fn submit_neutralizes_markup() {
    // Arrange
    let static_dir = make_static_dir();
    let mut email = MockEmailService::new();
    email
        .expect_send()
        .once()
        .withf(|email| {
            email
                .body
                .ends_with("\n&lt;script&gt;alert(1)&lt;/script&gt; preventivo gomme")
                && !email.body.contains("<script>")
        })
        .return_once(|_| Box::pin(std::future::ready(Ok(true))));

    let router = make_router(
        MockHealthFeatureService::new(),
        make_contact_service(email),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    let response = send(
        &router,
        post_json(
            "/api/contatti",
            &valid_form("<script>alert(1)</script> preventivo gomme"),
        ),
    )
    .await;

    // Assert
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["success"], true);
}

#[tokio::test]
async fn submit_rate_limited() {
    // Arrange
    let static_dir = make_static_dir();
    let mut email = MockEmailService::new();
    email
        .expect_send()
        .times(5)
        .returning(|_| Box::pin(std::future::ready(Ok(true))));

    let router = make_router(
        MockHealthFeatureService::new(),
        make_contact_service(email),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    let mut statuses = Vec::new();
    for _ in 0..5 {
        let response = send(&router, post_json("/api/contatti", &valid_form(MESSAGE))).await;
        statuses.push(response.status);
    }
    let response = send(&router, post_json("/api/contatti", &valid_form(MESSAGE))).await;

    // Assert
    assert_eq!(statuses, [StatusCode::OK; 5]);
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response.json(),
        json!({"success": false, "message": "Hai inviato troppi messaggi. Riprova tra un'ora."})
    );
    assert_eq!(response.header("ratelimit-limit"), Some("5"));
    assert_eq!(response.header("ratelimit-remaining"), Some("0"));
    let retry_after = response
        .header("retry-after")
        .unwrap()
        .parse::<u64>()
        .unwrap();
    assert!((3590..=3600).contains(&retry_after), "{retry_after}");
}

#[tokio::test]
async fn submit_invalid_counts_against_limit() {
    // Arrange
    let static_dir = make_static_dir();
    let router = make_router(
        MockHealthFeatureService::new(),
        make_contact_service(MockEmailService::new()),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    for _ in 0..5 {
        send(&router, post_json("/api/contatti", &json!({}))).await;
    }
    let response = send(&router, post_json("/api/contatti", &valid_form(MESSAGE))).await;

    // Assert
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn submit_provider_failure() {
    // Arrange
    let static_dir = make_static_dir();
    let mut email = MockEmailService::new();
    email
        .expect_send()
        .once()
        .return_once(|_| {
            Box::pin(std::future::ready(Err(anyhow::anyhow!(
                "provider api key re_secret is invalid"
            ))))
        });

    let router = make_router(
        MockHealthFeatureService::new(),
        make_contact_service(email),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    let response = send(&router, post_json("/api/contatti", &valid_form(MESSAGE))).await;

    // Assert
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({"success": false, "message": "Si è verificato un errore interno. Riprova più tardi."})
    );
}

#[tokio::test]
async fn submit_consent_missing() {
    // Arrange
    let static_dir = make_static_dir();
    let router = make_router(
        MockHealthFeatureService::new(),
        make_contact_service(MockEmailService::new()),
        make_config(static_dir.path(), Environment::Development),
    );

    let mut form = valid_form(MESSAGE);
    form["privacy"] = json!(false);

    // Act
    let response = send(&router, post_json("/api/contatti", &form)).await;

    // Assert
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"success": false, "message": "È necessario accettare l'informativa sulla privacy."})
    );
}

#[tokio::test]
async fn submit_malformed_json() {
    // Arrange
    let static_dir = make_static_dir();
    let router = make_router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    let response = send(
        &router,
        request(
            Method::POST,
            "/api/contatti",
            Some("application/json"),
            Body::from("{\"nome\": "),
        ),
    )
    .await;

    // Assert
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"success": false, "message": "Formato della richiesta non valido."})
    );
}

#[tokio::test]
async fn submit_body_too_large() {
    // Arrange
    let static_dir = make_static_dir();
    let router = make_router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    let response = send(
        &router,
        post_json("/api/contatti", &valid_form(&"x".repeat(11 * 1024))),
    )
    .await;

    // Assert
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json()["success"], false);
}

#[tokio::test]
async fn submit_urlencoded() {
    // Arrange
    let static_dir = make_static_dir();
    let mut email = MockEmailService::new();
    email
        .expect_send()
        .once()
        .withf(|email| email.reply_to == Some("m.rossi@example.com".parse().unwrap()))
        .return_once(|_| Box::pin(std::future::ready(Ok(true))));

    let router = make_router(
        MockHealthFeatureService::new(),
        make_contact_service(email),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    let response = send(
        &router,
        request(
            Method::POST,
            "/api/contatti",
            Some("application/x-www-form-urlencoded"),
            Body::from(
                "nome=Mario+Rossi&email=m.rossi%40example.com\
                 &messaggio=Vorrei+un+preventivo+per+4+gomme.&privacy=on",
            ),
        ),
    )
    .await;

    // Assert
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["success"], true);
}

#[tokio::test]
async fn submit_wrong_method() {
    // Arrange
    let static_dir = make_static_dir();
    let router = make_router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
        make_config(static_dir.path(), Environment::Development),
    );

    // Act
    let response = send(&router, get("/api/contatti")).await;

    // Assert
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.json(),
        json!({"success": false, "message": "Endpoint API non trovato."})
    );
}
