fn main() {
    weft::cli::run();
}
