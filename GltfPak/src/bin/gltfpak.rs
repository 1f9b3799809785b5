fn main() -> anyhow::Result<()> {
    gltfpak::cli::run_cli()
}
