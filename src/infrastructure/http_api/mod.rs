pub mod plan_api_client;
