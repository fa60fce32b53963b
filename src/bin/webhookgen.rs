//! Print the SDEWAN CRDs and the label webhook registration as YAML.
//!
//! ```bash
//! WEBHOOK_SERVICE_NAMESPACE=sdewan-system cargo run --bin webhookgen | kubectl apply -f -
//! ```

use sdewan_label_webhook::Config;
use sdewan_label_webhook::crd::all_crds;
use sdewan_label_webhook::webhooks::validating_webhook_configuration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    for crd in all_crds() {
        print!("---\n{}", serde_yaml::to_string(&crd)?);
    }

    let webhook = validating_webhook_configuration(&config.service_target(), None);
    print!("---\n{}", serde_yaml::to_string(&webhook)?);

    Ok(())
}
