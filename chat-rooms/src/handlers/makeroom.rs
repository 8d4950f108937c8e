use log::info;
use wire::Reply;

use crate::{state::Db, types::ChatRoom};

pub async fn handle_make_room(room: ChatRoom, db: &Db) -> Reply {
    info!("Received makeroom command: {}", room);
    db.make_room(room).await;
    Reply::empty()
}
