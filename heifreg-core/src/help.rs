//! Expected help text of the subject tools.
//!
//! Both tools print their usage block to standard error. The templates carry
//! `{appname}` and `{version}` placeholders.

/// Usage block of `heif-info`.
pub const HEIF_INFO_HELP: &str = r#" {appname}  libheif version: {version}
------------------------------------
usage: {appname} [options] image.heic

options:
  -d, --dump-boxes     show a low-level dump of all MP4 file boxes
  -h, --help           show help
  -v, --version        show version
"#;

/// Usage block of `heif-convert`.
pub const HEIF_CONVERT_HELP: &str = r#" {appname}  libheif version: {version}
-------------------------------------------
Usage: {appname} [options]  <input-image> [output-image]

The program determines the output file format from the output filename suffix.
These suffixes are recognized: jpg, jpeg, png, y4m. If no output filename is specified, 'jpg' is used.

Options:
  -h, --help                     show help
  -v, --version                  show version
  -q, --quality                  quality (for JPEG output)
  -o, --output FILENAME          write output to FILENAME (optional)
  -d, --decoder ID               use a specific decoder (see --list-decoders)
      --with-aux                 also write auxiliary images (e.g. depth images)
      --with-xmp                 write XMP metadata to file (output filename with .xmp suffix)
      --with-exif                write EXIF metadata to file (output filename with .exif suffix)
      --skip-exif-offset         skip EXIF metadata offset bytes
      --no-colons                replace ':' characters in auxiliary image filenames with '_'
      --list-decoders            list all available decoders (built-in and plugins)
      --quiet                    do not output status messages to console
  -C, --chroma-upsampling ALGO   Force chroma upsampling algorithm (nn = nearest-neighbor / bilinear)
      --png-compression-level #  Set to integer between 0 (fastest) and 9 (best). Use -1 for default.
"#;

/// Substitute program name and version into a help template.
pub fn render(template: &str, program: &str, version: &str) -> String {
    template
        .replace("{appname}", program)
        .replace("{version}", version)
}
