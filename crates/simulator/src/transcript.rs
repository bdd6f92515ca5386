//! Canned compiler transcript for languages that cannot run offline

use nexus_core::files::SourceFile;

/// Deterministic build log naming the target language and file
pub fn compiler_transcript(banner: &str, file: &SourceFile) -> String {
    format!(
        "[{banner}] Target: {language}\n\
         > Analysing dependencies... OK\n\
         > Checking syntax for {name}... OK\n\
         > Compiling objects...\n\
         > Linking...\n\
         \n\
         Build Successful! (0.4s)\n\
         --------------------------------------------------\n\
         [SYSTEM] Note: this is an offline simulation.\n\
         The code was not actually executed on this device.\n\
         Enable online mode for real cloud execution.",
        banner = banner,
        language = file.language,
        name = file.name,
    )
}
