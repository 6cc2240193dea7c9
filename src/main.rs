fn main() -> Result<(), Box<dyn std::error::Error>> {
    songmap::runtime::run()
}
