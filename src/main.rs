use mapconv::app::cli;

fn main() {
    cli::run();
}
