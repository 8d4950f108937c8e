mod get;
mod list;
mod put;

pub use get::handle_get;
pub use list::handle_list;
pub use put::handle_put;

use log::info;
use wire::{Reply, Request};

use crate::{message::FileRequest, state::SharedDir};

/// Decodes one request envelope and answers it. Failures become in-band replies.
pub async fn handle_request(request: Request, dir: &SharedDir) -> Reply {
    let outcome = match FileRequest::try_from(request) {
        Ok(FileRequest::Get { filename }) => handle_get(&filename, dir).await,
        Ok(FileRequest::Put { filename, contents }) => handle_put(&filename, &contents, dir).await,
        Ok(FileRequest::RList) => handle_list(dir).await,
        Ok(FileRequest::Bye) => {
            info!("Received bye command.");
            Ok(Reply::empty())
        }
        Err(e) => Err(e),
    };

    outcome.unwrap_or_else(Reply::from)
}
