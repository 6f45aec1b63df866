use std::env;

fn main() {

    // Unix family systems are assumed to have libsdl2*-dev etc. installed with
    // the package manager. On a windows OS the C built sdl2 libraries are
    // looked for in ./sdl_libs (or $SDL_LIBS_DIR), which is also where the
    // `cargo run` command looks for sdl2 dlls.
    if cfg!(target_family = "windows") {

        let libs_dir = env::var("SDL_LIBS_DIR").ok().or_else(|| {
            env::var("CARGO_MANIFEST_DIR")
                .ok()
                .map(|cargo_root_dir| format!("{}/sdl_libs", cargo_root_dir))
        });

        if let Some(libs) = libs_dir {
            println!("cargo:rustc-flags=-L {}", libs);
        }
    }
}
