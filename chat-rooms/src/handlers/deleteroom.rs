use log::info;
use wire::Reply;

use crate::{errors::DirectoryError, state::Db};

pub async fn handle_delete_room(name: &str, db: &Db) -> Result<Reply, DirectoryError> {
    info!("Received deleteroom command: {}", name);

    match db.delete_room(name).await {
        Some(_) => Ok(Reply::empty()),
        None => Err(DirectoryError::RoomNotFound(name.to_string())),
    }
}
