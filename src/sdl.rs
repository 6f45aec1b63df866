use sdl2;

pub struct SdlSetup {
    pub sdl_context: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
}

pub fn init() -> SdlSetup {

    let sdl_context: sdl2::Sdl = sdl2::init().expect("Failed to init sdl2");
    let video_subsystem: sdl2::VideoSubsystem =
        sdl_context.video().expect("Failed to init the sdl2 video subsystem");

    SdlSetup {
        sdl_context,
        video_subsystem,
    }
}
