use log::{error, info};
use wire::Reply;

use crate::{errors::FileError, state::SharedDir};

pub async fn handle_put(
    filename: &str,
    contents: &[u8],
    dir: &SharedDir,
) -> Result<Reply, FileError> {
    info!("Received put command for {} ({} bytes).", filename, contents.len());

    if let Err(e) = dir.write(filename, contents).await {
        error!("Error writing file {}: {}", filename, e);
        return Err(e);
    }

    info!("Received file: {}", filename);
    Ok(Reply::empty())
}
