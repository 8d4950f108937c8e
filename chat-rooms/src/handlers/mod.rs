mod deleteroom;
mod getdir;
mod makeroom;

pub use deleteroom::handle_delete_room;
pub use getdir::handle_get_dir;
pub use makeroom::handle_make_room;

use wire::{Reply, Request};

use crate::{message::DirectoryRequest, state::Db};

/// Decodes one request envelope and answers it. Failures become in-band replies.
pub async fn handle_request(request: Request, db: &Db) -> Reply {
    let outcome = match DirectoryRequest::try_from(request) {
        Ok(DirectoryRequest::GetDir) => Ok(handle_get_dir(db).await),
        Ok(DirectoryRequest::MakeRoom(room)) => Ok(handle_make_room(room, db).await),
        Ok(DirectoryRequest::DeleteRoom(name)) => handle_delete_room(&name, db).await,
        Err(e) => Err(e),
    };

    outcome.unwrap_or_else(Reply::from)
}
