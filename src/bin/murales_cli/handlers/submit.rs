#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use murales::application::repos::ImageUploader;
use murales::application::submission::SubmissionService;
use murales::domain::region::Coordinates;
use murales::domain::submission::SubmissionDraft;

use crate::args::SubmitArgs;
use crate::client::{CliError, Ctx};

pub async fn handle(ctx: &Ctx, args: SubmitArgs) -> Result<(), CliError> {
    let uploader: Option<Arc<dyn ImageUploader>> = match &args.image_file {
        Some(_) => Some(Arc::new(ctx.uploader()?)),
        None => None,
    };
    let service = SubmissionService::new(ctx.api.clone(), Arc::new(ctx.geocoder()?), uploader);

    let mut draft = SubmissionDraft::new(args.email);
    draft.name = args.name;

    if let Some(path) = &args.image_file {
        service
            .upload_image(&mut draft, path)
            .await
            .map_err(|err| CliError::Failed(err.to_string()))?;
    } else if let (Some(url), Some(public_id)) = (args.image_url, args.public_id) {
        draft.set_uploaded_image(url, public_id);
    }

    service
        .pick_location(&mut draft, Coordinates::new(args.point.lat, args.point.lng))
        .await
        .map_err(|err| CliError::Failed(err.to_string()))?;
    if let Some(address) = &draft.address {
        println!("Location: {}", address.formatted_address);
    }

    let message = service
        .submit(&mut draft)
        .await
        .map_err(|err| CliError::Failed(err.to_string()))?;
    println!("{message}");
    Ok(())
}
