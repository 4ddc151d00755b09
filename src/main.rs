use twofat::config::Config;
use twofat::errors::VaultError;
use twofat::output;
use twofat::password::detect_input;
use twofat::vault::Store;

fn main() {
    let config = match Config::from_process() {
        Ok(config) => config,
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    if let Err(e) = twofat::logging::init(&config.log_filter) {
        output::warning(&e.to_string());
    }

    let store = Store::new(&config);
    output::info(&format!("Datafile: {}", store.path().display()));

    match store.exists() {
        Ok(false) => output::info("Initializing datafile"),
        Ok(true) => {}
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    }

    // Picked once: piped stdin or a masked prompt.
    let mut input = detect_input();

    match store.load(input.as_mut()) {
        Ok(db) => {
            output::success(&format!("Datafile unlocked: {} account(s)", db.len()));
        }
        Err(e @ VaultError::LegacyFormatDetected) => {
            output::warning(&e.to_string());
            std::process::exit(1);
        }
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    }
}
