use bevy::app::AppExit;

fn main() -> AppExit {
    nebula::run()
}
