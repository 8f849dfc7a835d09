use argh::FromArgs;
use character_forge::{
    CharacterField, DirectorySaver, FormController, HttpGenerationClient, ResultView,
};
use std::path::PathBuf;

// defaults for the client
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3000;

#[derive(FromArgs)]
/// Character Forge client: fill in the form and generate a full-body image
struct ClientArgs {
    /// the host to connect to
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to connect to
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// the reference portrait (jpg or png)
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// time period, e.g. "Early 19th Century"
    #[argh(option)]
    time_period: String,

    /// role or occupation, e.g. "Prison Reformer"
    #[argh(option)]
    role: String,

    /// comma separated clothing keywords
    #[argh(option)]
    clothing: String,

    /// optional outfit description sentence
    #[argh(option, default = "String::new()")]
    outfit: String,

    /// print the prompt that was sent to the provider
    #[argh(switch)]
    debug: bool,

    /// directory to save the generated image into
    #[argh(option, short = 'o')]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: ClientArgs = argh::from_env();

    let mut form = FormController::new();
    form.update_field(CharacterField::TimePeriod, args.time_period);
    form.update_field(CharacterField::RoleOccupation, args.role);
    form.update_field(CharacterField::ClothingDescriptors, args.clothing);
    form.update_field(CharacterField::OutfitDescriptionSentence, args.outfit);
    form.load_image(&args.image_path)?;

    if args.debug {
        form.toggle_debug();
    }

    let client = HttpGenerationClient::new(&format!("http://{}:{}", args.host, args.port));
    println!("{}", ResultView::Loading.headline());

    if let Err(e) = form.generate(&client).await {
        log::debug!("Generation attempt failed: {e:?}");
    }

    match form.result_view() {
        ResultView::Image(url) => {
            let preview: String = url.chars().take(64).collect();
            println!("Image: {preview}…");
        }
        view => println!("{}", view.headline()),
    }

    if let Some(prompt) = form.visible_debug_prompt() {
        println!("--- {} ---\n{}", form.debug_toggle_label(), prompt);
    }

    if let Some(dir) = args.output_dir {
        let saver = DirectorySaver::new(dir);
        if form.download(&saver).await? {
            println!(
                "Saved to {}",
                saver.dir().join(character_forge::DOWNLOAD_FILE_NAME).display()
            );
        }
    }

    Ok(())
}
