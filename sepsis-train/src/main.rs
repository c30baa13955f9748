use std::error::Error;

use sepsis_forest::ParamGuard;
use sepsis_train::{logging, PipelineParams};

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let params = PipelineParams::default().check()?;
    let summary = sepsis_train::run(&params)?;

    println!(
        "Model training complete and saved as {}",
        summary.output.display()
    );

    Ok(())
}
