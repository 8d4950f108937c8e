use log::{info, warn};
use wire::Reply;

use crate::{errors::FileError, state::SharedDir};

/// Replies with the whole file; the envelope length is the file size.
pub async fn handle_get(filename: &str, dir: &SharedDir) -> Result<Reply, FileError> {
    info!("Received get command for {}.", filename);

    let contents = dir.read(filename).await.map_err(|e| {
        warn!("Error: Requested file {} is not available! ({})", filename, e);
        e
    })?;

    info!("Sending file {} ({} bytes).", filename, contents.len());
    Ok(Reply::ok(contents))
}
