#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use murales::application::murals::{FetchOutcome, LOAD_ERROR, MuralsController};
use murales::application::repos::MuralsRepo;
use murales::domain::filters::MuralFilters;
use murales::domain::images::optimized_url;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::args::MuralsCmd;
use crate::client::{CliError, Ctx};
use crate::print::{location_line, print_json, render_murals};

pub async fn handle(ctx: &Ctx, cmd: MuralsCmd) -> Result<(), CliError> {
    match cmd {
        MuralsCmd::List {
            name,
            province,
            municipality,
            neighborhood,
            page,
        } => {
            let filters = MuralFilters {
                name: name.unwrap_or_default(),
                province: province.unwrap_or_default(),
                municipality: municipality.unwrap_or_default(),
                neighborhood: neighborhood.unwrap_or_default(),
            };
            list(ctx, &filters, page).await
        }
        MuralsCmd::Search => search(ctx).await,
        MuralsCmd::Map => map(ctx).await,
        MuralsCmd::Show { id } => show(ctx, &id).await,
    }
}

async fn list(ctx: &Ctx, filters: &MuralFilters, page: u32) -> Result<(), CliError> {
    let controller = MuralsController::new(ctx.api.clone());
    match controller.restore(filters, page).await {
        FetchOutcome::Applied => {
            print!("{}", render_murals(&controller.snapshot()));
            Ok(())
        }
        FetchOutcome::Failed | FetchOutcome::Superseded => {
            Err(CliError::Failed(LOAD_ERROR.to_string()))
        }
    }
}

/// Each stdin line is one state of the search box. Only text that stays
/// unchanged for the configured window reaches the backend.
async fn search(ctx: &Ctx) -> Result<(), CliError> {
    let controller = Arc::new(MuralsController::new(ctx.api.clone()));
    let typing = controller.name_debouncer(ctx.settings.list.debounce);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| CliError::InvalidInput(e.to_string()))?
    {
        typing.push(line.trim());
    }
    typing.finish().await;

    let mut state = controller.snapshot();
    if state.filters.name.is_empty() {
        if controller.fetch_murals().await != FetchOutcome::Applied {
            return Err(CliError::Failed(LOAD_ERROR.to_string()));
        }
        state = controller.snapshot();
    }
    if let Some(error) = state.error.as_deref() {
        return Err(CliError::Failed(error.to_string()));
    }
    print!("{}", render_murals(&state));
    Ok(())
}

async fn map(ctx: &Ctx) -> Result<(), CliError> {
    let murals = ctx.api.map_murals().await?;
    println!("{} murals", murals.len());
    for mural in &murals {
        println!(
            "{:>10.5} {:>10.5}  {}  {}",
            mural.latitude,
            mural.longitude,
            mural.name,
            location_line(mural)
        );
    }
    Ok(())
}

async fn show(ctx: &Ctx, id: &str) -> Result<(), CliError> {
    let mut mural = ctx.api.get_mural(id).await?;
    mural.image_url = optimized_url(&mural.image_url);
    print_json(&mural)
}
