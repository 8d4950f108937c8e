use log::info;
use wire::Reply;

use crate::{errors::FileError, state::SharedDir};

/// One name per line, each terminated by a newline.
pub async fn handle_list(dir: &SharedDir) -> Result<Reply, FileError> {
    info!("Received rlist command.");

    let listing: String = dir
        .list()
        .await?
        .into_iter()
        .map(|name| name + "\n")
        .collect();

    Ok(Reply::ok(listing))
}
