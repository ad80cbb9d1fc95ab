use client_core::LaunchState;

pub fn render(state: &LaunchState) -> String {
    match state {
        LaunchState::Idle => "Ready to launch.".to_string(),
        LaunchState::Launching { .. } => "Launching bot...".to_string(),
        LaunchState::RoomCreated { room_url, .. } => {
            format!("Room created successfully!\n{room_url}")
        }
        LaunchState::Error { error, .. } => error.user_message(),
    }
}
