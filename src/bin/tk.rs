// tk entry point: all argument handling lives in `tk::cli`.

fn main() {
    tk::cli::run();
}
