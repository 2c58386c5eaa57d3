use rag_indexer::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_tracing_subscriber, init_tracing_subscriber},
};
use tracing::error;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let tracing_subscriber =
        get_tracing_subscriber("rag_indexer".into(), "info".into(), std::io::stdout);
    init_tracing_subscriber(tracing_subscriber);

    // Panics if the configuration can't be read
    let configuration = get_configuration().expect("Failed to read configuration.");

    let application = match Application::build(configuration) {
        Ok(application) => application,
        Err(error) => panic!("Failed to build application: {:?}", error),
    };

    match application.run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            error!(?error, "Indexing failed");
            std::process::ExitCode::FAILURE
        }
    }
}
