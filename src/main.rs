use praxiskalender::Cli;

fn main() -> anyhow::Result<()> {
    Cli::run()
}
