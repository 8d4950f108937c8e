use log::info;
use wire::Reply;

use crate::{message::render_listing, state::Db};

pub async fn handle_get_dir(db: &Db) -> Reply {
    let rooms = db.rooms().await;
    info!("Received getdir command, {} rooms listed.", rooms.len());
    Reply::ok(render_listing(&rooms))
}
