use std::process;

use anyhow::{bail, Context, Result};
use rsa_messenger::util::FileKeyStore;
use rsa_messenger::Keyring;

const USAGE: &str = "rsa-messenger <option> <other arguments>
\tkeyGen \t\t- keySize
\tpublish \t- email
\tregister \t- email
\timportKey \t- email keyJson
\tsendMsg \t- email plaintext
\tgetMsg \t\t- email messageJson";

fn run(args: &[String]) -> Result<()> {
    let keyring = Keyring::new(FileKeyStore::current_dir()?);

    match args {
        [option, size] if option == "keyGen" => {
            let key_size: usize = size
                .parse()
                .with_context(|| format!("invalid key size {:?}", size))?;
            let keypair = keyring.generate(key_size)?;
            println!("Generated {}-bit key pair", keypair.bit_length());
        }
        [option, email] if option == "publish" => {
            println!("{}", keyring.publish(email)?.to_json()?);
        }
        [option, email] if option == "register" => {
            if keyring.register_identity(email)? {
                println!("Registered {}", email);
            } else {
                println!("{} already registered", email);
            }
        }
        [option, email, json] if option == "importKey" => {
            keyring.import_public_key(email, json.as_bytes())?;
            println!("Key saved for {}", email);
        }
        [option, email, plaintext] if option == "sendMsg" => {
            println!("{}", keyring.seal_message(email, plaintext)?.to_json()?);
        }
        [option, email, json] if option == "getMsg" => {
            println!("{}", keyring.open_message(email, json.as_bytes())?);
        }
        _ => bail!("{}", USAGE),
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
