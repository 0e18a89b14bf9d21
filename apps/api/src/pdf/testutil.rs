//! In-memory PDF builders shared by unit tests across modules.

use lopdf::{dictionary, Document, Object, Stream};

/// One page of a to-be-built test document.
pub struct TestPage {
    pub text: String,
    pub with_image: bool,
    pub link: Option<String>,
}

impl TestPage {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            with_image: false,
            link: None,
        }
    }

    pub fn image_only() -> Self {
        Self {
            text: String::new(),
            with_image: true,
            link: None,
        }
    }

    pub fn with_link(mut self, url: &str) -> Self {
        self.link = Some(url.to_string());
        self
    }

    pub fn with_image(mut self) -> Self {
        self.with_image = true;
        self
    }
}

/// Builds a minimal multi-page PDF with text streams and, per page,
/// optional image XObjects and link annotations.
pub fn build_pdf(pages: &[TestPage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for spec in pages {
        let mut resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };
        if spec.with_image {
            let image = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 612,
                    "Height" => 792,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![0u8; 16],
            );
            let image_id = doc.add_object(image);
            resources.set("XObject", dictionary! { "Im0" => image_id });
        }
        let resources_id = doc.add_object(resources);

        // One Tj per line so multi-line fixtures survive extraction.
        let mut content = String::from("BT /F1 12 Tf 72 720 Td ");
        for (i, line) in spec.text.lines().enumerate() {
            if i > 0 {
                content.push_str("0 -14 Td ");
            }
            let escaped = line.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
            content.push_str(&format!("({escaped}) Tj "));
        }
        content.push_str("ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        if let Some(url) = &spec.link {
            let annot_id = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![0.into(), 0.into(), 100.into(), 20.into()],
                "A" => dictionary! {
                    "Type" => "Action",
                    "S" => "URI",
                    "URI" => Object::string_literal(url.as_str()),
                },
            });
            page.set("Annots", vec![annot_id.into()]);
        }
        kids.push(doc.add_object(page).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("test pdf must serialize");
    bytes
}

/// A one-page text resume fixture with enough signals to pass the
/// validity gate.
pub fn resume_pdf() -> Vec<u8> {
    build_pdf(&[TestPage::text(
        "Jane Doe\n\
         jane.doe@example.com +1 555 123 4567\n\
         Skills: Rust, Python, PostgreSQL\n\
         Experience: Senior Engineer at Initech, Jan 2020 - Present\n\
         Education: B.S. Computer Science, State University\n\
         Projects: payments platform, certification in cloud architecture\n\
         Employment history includes substantial backend work experience",
    )
    .with_link("github.com/janedoe")])
}
