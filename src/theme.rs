use std::error;
use std::fmt;
use std::fs;
use std::path::Path;

// fallback template wrapping the rendered image in a pgfplots axis
const SIMPLE: &str = r"\begin{tikzpicture}
\begin{axis}[
    enlargelimits = false,
    axis on top = true,
    axis equal image,
    point meta min = %(data_min),
    point meta max = %(data_max),
    xlabel = {%(x_label)},
    ylabel = {%(y_label)},
    colorbar horizontal,
    %(colormap),
    ]
    \addplot graphics [
        xmin = %(x_min),
        xmax = %(x_max),
        ymin = %(y_min),
        ymax = %(y_max)
    ] {%(image_path)};
\end{axis}
\end{tikzpicture}
";

const HEADER: &str = r"% package includes for the generated snippets
\usepackage{pgfplots}
\pgfplotsset{compat=1.15}
\usepgfplotslibrary{colormaps}
";

// a TeX template with %(key) placeholders, kept alongside its backing path
// so it can be reloaded
#[derive(Debug, Clone)]
pub struct Theme {
    path: Option<String>,
    string: String,
}

impl Theme {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ThemeError> {
        let path = path.as_ref().display().to_string();
        let string = fs::read_to_string(&path).map_err(|_| ThemeError::NotFound(path.clone()))?;

        Ok(Theme {
            path: Some(path),
            string,
        })
    }

    // the built-in simple theme; reload is a no-op for it
    pub fn simple() -> Self {
        Theme {
            path: None,
            string: SIMPLE.to_string(),
        }
    }

    pub fn reload(&mut self) -> Result<(), ThemeError> {
        if let Some(p) = &self.path {
            self.string = fs::read_to_string(p).map_err(|_| ThemeError::NotFound(p.clone()))?;
        }

        Ok(())
    }

    pub fn string(&self) -> &str {
        &self.string
    }
}

// the computed field set merged into a theme at render time
#[derive(Debug, Clone)]
pub struct PlotInfo {
    pub data_min: f64,
    pub data_max: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub x_label: String,
    pub y_min: f64,
    pub y_max: f64,
    pub y_label: String,
    pub image_path: String,
    pub colormap: String,
    pub extra: Vec<(String, String)>,
}

impl PlotInfo {
    fn lookup(&self, key: &str) -> Option<String> {
        // caller-supplied extras take precedence over the computed fields,
        // and later extras over earlier ones
        if let Some((_, v)) = self.extra.iter().rev().find(|(k, _)| k == key) {
            return Some(v.clone());
        }

        match key {
            "data_min" => Some(self.data_min.to_string()),
            "data_max" => Some(self.data_max.to_string()),
            "x_min" => Some(self.x_min.to_string()),
            "x_max" => Some(self.x_max.to_string()),
            "x_label" => Some(self.x_label.clone()),
            "y_min" => Some(self.y_min.to_string()),
            "y_max" => Some(self.y_max.to_string()),
            "y_label" => Some(self.y_label.clone()),
            "image_path" => Some(self.image_path.clone()),
            "colormap" => Some(self.colormap.clone()),
            _ => None,
        }
    }
}

// substitute %(key) placeholders; %% is a literal percent and a bare %
// passes through so TeX comments survive
pub fn render(theme: &Theme, info: &PlotInfo) -> Result<String, ThemeError> {
    let template = theme.string();
    let mut res = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(i) = rest.find('%') {
        res.push_str(&rest[..i]);
        let tail = &rest[i + 1..];

        if let Some(t) = tail.strip_prefix('%') {
            res.push('%');
            rest = t;
        } else if let Some(t) = tail.strip_prefix('(') {
            let end = t
                .find(')')
                .ok_or_else(|| ThemeError::BadTemplate("unterminated placeholder".to_string()))?;
            let key = &t[..end];
            let val = info
                .lookup(key)
                .ok_or_else(|| ThemeError::MissingField(key.to_string()))?;
            res.push_str(&val);
            rest = &t[end + 1..];
        } else {
            res.push('%');
            rest = tail;
        }
    }

    res.push_str(rest);
    Ok(res)
}

pub fn write_markup<P: AsRef<Path>>(path: P, content: &str) -> Result<(), ThemeError> {
    fs::write(&path, content).map_err(|e| {
        ThemeError::WriteFail(path.as_ref().display().to_string(), e.to_string())
    })
}

// TeX preamble include listing the packages the generated snippets need
pub fn write_header<P: AsRef<Path>>(path: P) -> Result<(), ThemeError> {
    fs::write(&path, HEADER).map_err(|e| {
        ThemeError::WriteFail(path.as_ref().display().to_string(), e.to_string())
    })
}

#[derive(Debug, Clone)]
pub enum ThemeError {
    NotFound(String),
    BadTemplate(String),
    MissingField(String),
    WriteFail(String, String),
}

impl error::Error for ThemeError {}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ThemeError: ")?;
        match self {
            ThemeError::NotFound(p) => {
                write!(f, "could not find theme file {}", p)
            }
            ThemeError::BadTemplate(msg) => {
                write!(f, "bad template: {}", msg)
            }
            ThemeError::MissingField(k) => {
                write!(f, "template references missing field {}", k)
            }
            ThemeError::WriteFail(p, msg) => {
                write!(f, "could not write to {}: {}", p, msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{render, PlotInfo, Theme, ThemeError};

    fn theme_of(s: &str) -> Theme {
        Theme {
            path: None,
            string: s.to_string(),
        }
    }

    fn dummy_info() -> PlotInfo {
        PlotInfo {
            data_min: 0.0,
            data_max: 5.0,
            x_min: 0.0,
            x_max: 3.0,
            x_label: "x".to_string(),
            y_min: 0.0,
            y_max: 4.0,
            y_label: "y".to_string(),
            image_path: "out".to_string(),
            colormap: "colormap={jet}{}".to_string(),
            extra: Vec::new(),
        }
    }

    #[test]
    fn substitutes_fields() {
        let theme = theme_of("min %(data_min) max %(data_max) at {%(image_path)}");
        let out = render(&theme, &dummy_info()).unwrap();

        assert_eq!(out, "min 0 max 5 at {out}");
    }

    #[test]
    fn unused_fields_are_ignored() {
        // the info carries many fields the template never mentions
        let theme = theme_of("%(x_label) only");
        let mut info = dummy_info();
        info.extra.push(("unrelated".to_string(), "c".to_string()));

        assert_eq!(render(&theme, &info).unwrap(), "x only");
    }

    #[test]
    fn missing_field_is_an_error() {
        let theme = theme_of("%(data_min) and %(nope)");
        let res = render(&theme, &dummy_info());

        assert!(matches!(res, Err(ThemeError::MissingField(k)) if k == "nope"));
    }

    #[test]
    fn caller_extras_override_computed_fields() {
        let theme = theme_of("%(x_label)/%(note)");
        let mut info = dummy_info();
        info.extra.push(("note".to_string(), "first".to_string()));
        info.extra.push(("x_label".to_string(), "time".to_string()));
        info.extra.push(("note".to_string(), "last".to_string()));

        assert_eq!(render(&theme, &info).unwrap(), "time/last");
    }

    #[test]
    fn percent_handling() {
        let theme = theme_of("100%% done % comment\n%(x_label)");
        let out = render(&theme, &dummy_info()).unwrap();

        assert_eq!(out, "100% done % comment\nx");
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        let theme = theme_of("%(data_min");
        assert!(matches!(
            render(&theme, &dummy_info()),
            Err(ThemeError::BadTemplate(_))
        ));
    }

    #[test]
    fn simple_theme_renders() {
        let out = render(&Theme::simple(), &dummy_info()).unwrap();

        assert!(out.contains("point meta min = 0"));
        assert!(out.contains("point meta max = 5"));
        assert!(out.contains("xmax = 3"));
        assert!(out.contains("ymax = 4"));
        assert!(out.contains("{out}"));
        assert!(out.contains("colormap={jet}{}"));
    }

    #[test]
    fn reload_is_a_noop_for_builtin() {
        let mut theme = Theme::simple();
        let before = theme.string().to_string();
        theme.reload().unwrap();

        assert_eq!(theme.string(), before);
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(matches!(
            Theme::load("no_such_theme.tex"),
            Err(ThemeError::NotFound(_))
        ));
    }
}
