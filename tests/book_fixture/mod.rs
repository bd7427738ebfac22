#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bookmigrate::config::Settings;

pub const COMICS_HTML: &str = r#"<!doctype html>
<html>
  <head><title>Keywords for Comics Studies, Second Edition</title></head>
  <body>
    <div id="cip"><p>Copyright © 2020 by New York University</p></div>
    <section id="intro">
      <h1>Introduction</h1>
      <p class="au">Ramzi Fawaz and Deborah Whaley</p>
      <p>Comics matter.</p>
    </section>
    <section id="acknow">
      <h1>Acknowledgments</h1>
      <p>Thanks to everyone.</p>
    </section>
    <section>
      <h1>Archive</h1>
      <p class="cn">1</p>
      <span class="page" id="p12"></span>
      <p class="au">Jane Smith and John Doe Jr.</p>
      <p>Essay body text.</p>
      <div id="refs">
        <p class="rf">Lee, Mary. 2001. <i>Local Source</i>.</p>
      </div>
    </section>
    <div id="biblio">
      <p class="rf">Smith, J. 2000. <i>First</i>.</p>
      <p class="rf">———. 2001. <i>Second</i>.</p>
      <p class="rf">Doe, John. 1999. <i>Third</i>.</p>
    </div>
    <div id="contrib">
      <p class="aubio"><span class="aubion">Jane Smith</span> is a professor of media.</p>
      <p class="aubio">John Doe Jr. is a curator.</p>
      <p class="aubio">Mary Leeson holds a chair in art history.</p>
    </div>
  </body>
</html>
"#;

pub const MEDIA_HTML: &str = r#"<!doctype html>
<html>
  <head><title>Keywords for Media Studies</title></head>
  <body>
    <div id="cip"><p>© 2020 by New York University</p></div>
    <section id="intro">
      <h1>Introduction</h1>
      <p class="au">Laurie Ouellette</p>
      <p>Media matter.</p>
    </section>
    <div id="contrib">
      <p class="aubio">Jane Smyth is a professor of media and comics.</p>
    </div>
  </body>
</html>
"#;

pub const ABOUT_MD: &str = "Keywords for Comics Studies maps the field.\n\nIt has many essays.\n";

/// Creates `<site>/_html/<slug>/index.html` (and `about.md` when given).
pub fn write_book(site: &Path, slug: &str, html: &str, about: Option<&str>) -> anyhow::Result<()> {
    let dir = site.join("_html").join(slug);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("index.html"), html)?;
    if let Some(about) = about {
        fs::write(dir.join("about.md"), about)?;
    }
    Ok(())
}

pub fn settings(site: &Path) -> Settings {
    Settings {
        html_dir: site.join("_html"),
        posts_dir: site.join("_posts"),
        fuzzy_threshold: 0.9,
        synthetic_months: true,
        rights_holder: "New York University".to_owned(),
        default_availability: Some("print".to_owned()),
    }
}

/// File name → contents for every document in the posts collection.
pub fn snapshot(posts: &Path) -> anyhow::Result<BTreeMap<PathBuf, String>> {
    let mut files = BTreeMap::new();
    for entry in fs::read_dir(posts)? {
        let path = entry?.path();
        let contents = fs::read_to_string(&path)?;
        files.insert(PathBuf::from(path.file_name().unwrap_or_default()), contents);
    }
    Ok(files)
}
