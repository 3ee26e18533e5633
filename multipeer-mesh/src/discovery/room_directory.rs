use async_trait::async_trait;
use multipeer_core::RoomDescriptor;
use tracing::debug;

/// Fetches the room listing a signaling service exposes over HTTP.
#[async_trait]
pub trait RoomDirectory: Send + Sync + 'static {
    async fn fetch_rooms(&self, rooms_url: &str) -> anyhow::Result<Vec<RoomDescriptor>>;
}

/// `<base>/rooms`, tolerating a missing trailing slash on `base`.
pub fn rooms_url(base: &str) -> String {
    if base.ends_with('/') {
        format!("{}rooms", base)
    } else {
        format!("{}/rooms", base)
    }
}

/// Rooms of `app_name` listed at `base_url`. Any fetch failure yields `None`.
pub async fn server_rooms(
    directory: &dyn RoomDirectory,
    base_url: &str,
    app_name: &str,
) -> Option<Vec<RoomDescriptor>> {
    let url = rooms_url(base_url);
    match directory.fetch_rooms(&url).await {
        Ok(rooms) => Some(
            rooms
                .into_iter()
                .filter(|room| room.app_name == app_name)
                .collect(),
        ),
        Err(e) => {
            debug!("Room listing at {} unavailable: {:?}", url, e);
            None
        }
    }
}
