fn main() {
    if let Err(err) = moodstream_lib::run() {
        eprintln!("moodstream: {err:#}");
        std::process::exit(1);
    }
}
