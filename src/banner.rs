// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
   _       _                    _       _
  (_) ___ | |____      ____ _ _| |_ ___| |__
  | |/ _ \| '_ \ \ /\ / / _` |_   _/ __| '_ \
  | | (_) | |_) \ V  V / (_| | | || (__| | | |
 _/ |\___/|_.__/ \_/\_/ \__,_| |_| \___|_| |_|
|__/
    Pipeline Job Dashboard
"#;
    println!("{}", banner);
}
