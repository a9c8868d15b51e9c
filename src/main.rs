fn main() -> anyhow::Result<()> {
    read_aloud_lib::run()
}
