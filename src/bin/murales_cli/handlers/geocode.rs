#![deny(clippy::all, clippy::pedantic)]

use murales::application::repos::Geocoder;
use murales::domain::region::Coordinates;

use crate::args::PointArgs;
use crate::client::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, point: PointArgs) -> Result<(), CliError> {
    let geocoder = ctx.geocoder()?;
    let address = geocoder
        .reverse_geocode(Coordinates::new(point.lat, point.lng))
        .await
        .map_err(|err| CliError::Failed(err.to_string()))?;
    match address {
        Some(address) => print_json(&address),
        None => {
            println!("No address found for this location.");
            Ok(())
        }
    }
}
