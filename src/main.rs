fn main() -> Result<(), anyhow::Error> {
    docsmith::run()
}
