use crate::config::Config;
use crate::utils::database::DatabaseProvider;
use actix_web::web;

// Build the app under test around a provider and config
macro_rules! init_app {
    ($provider:expr, $config:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($provider.clone())
                .app_data($config.clone())
                .configure(crate::routes::configure),
        )
        .await
    };
}

// Send a request, return the status and the JSON body
macro_rules! call_json {
    ($app:expr, $request:expr) => {{
        let response = actix_web::test::call_service(&$app, $request.to_request()).await;
        let status = response.status();
        let body: serde_json::Value = actix_web::test::read_body_json(response).await;
        (status, body)
    }};
}


fn state(seed: bool) -> (web::Data<DatabaseProvider>, web::Data<Config>) {
    let config = Config {
        seed,
        ..Config::default()
    };
    let provider = DatabaseProvider::new();
    if seed {
        let store = provider.get_database();
        let mut db = store.write().expect("fresh lock");
        crate::utils::seed::populate(&mut db, config.invitation_ttl_days);
    }
    (web::Data::new(provider), web::Data::new(config))
}
