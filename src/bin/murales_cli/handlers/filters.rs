#![deny(clippy::all, clippy::pedantic)]

use murales::application::repos::FilterOptionsRepo;

use crate::args::FiltersCmd;
use crate::client::{CliError, Ctx};

pub async fn handle(ctx: &Ctx, cmd: FiltersCmd) -> Result<(), CliError> {
    let values = match cmd {
        FiltersCmd::Provinces => ctx.api.provinces().await?,
        FiltersCmd::Municipalities { province } => ctx.api.municipalities(&province).await?,
        FiltersCmd::Neighborhoods {
            province,
            municipality,
        } => {
            ctx.api
                .neighborhoods(&province, municipality.as_deref())
                .await?
        }
    };
    for value in values {
        println!("{value}");
    }
    Ok(())
}
