mod room_directory;

pub use room_directory::{RoomDirectory, rooms_url, server_rooms};
