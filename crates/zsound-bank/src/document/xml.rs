//! XML rendering of the bank description tree.

use std::io::{self, Write};

use super::Node;

/// Declaration line written before the root element.
pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>";

const INDENT: &str = "  ";

/// Writes `root` as an indented XML document.
///
/// Attributes keep their insertion order and childless elements are
/// self-closed, so identical trees always render to identical bytes.
pub fn write_xml<W: Write>(root: &Node, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", XML_DECLARATION)?;
    write_node(root, 0, writer)
}

/// Renders `root` to a string.
pub fn to_xml_string(root: &Node) -> String {
    let mut buf = Vec::new();
    write_xml(root, &mut buf).expect("writing to Vec should not fail");
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_node<W: Write>(node: &Node, depth: usize, writer: &mut W) -> io::Result<()> {
    let pad = INDENT.repeat(depth);

    let Some(tag) = node.tag() else {
        if let Node::Comment { text } = node {
            write_comment(text, &pad, writer)?;
        }
        return Ok(());
    };

    write!(writer, "{}<{}", pad, tag)?;
    for (name, value) in node.attributes().iter() {
        write!(writer, " {}=\"{}\"", name, escape(value))?;
    }

    let children = node.children();
    if children.is_empty() {
        return writeln!(writer, " />");
    }

    writeln!(writer, ">")?;
    for child in children {
        write_node(child, depth + 1, writer)?;
    }
    writeln!(writer, "{}</{}>", pad, tag)
}

fn write_comment<W: Write>(text: &str, pad: &str, writer: &mut W) -> io::Result<()> {
    // "--" may not appear inside a comment
    let text = text.replace("--", "- -");
    let mut lines = text.lines();
    match lines.next() {
        None => writeln!(writer, "{}<!---->", pad),
        Some(first) => {
            let rest: Vec<&str> = lines.collect();
            if rest.is_empty() {
                return writeln!(writer, "{}<!-- {} -->", pad, first);
            }
            writeln!(writer, "{}<!-- {}", pad, first)?;
            for line in rest {
                writeln!(writer, "{}{}{}", pad, INDENT, line)?;
            }
            writeln!(writer, "{}-->", pad)
        }
    }
}

/// Escapes the characters that cannot appear raw in a quoted attribute.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Field, Item, Section, StructNode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"Kick & "Snare" <1>"#), "Kick &amp; &quot;Snare&quot; &lt;1&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_render_nested() {
        let body = StructNode::new("ABSample")
            .comment("Bitfield layout")
            .field(Field::scalar("Bitfield", "uint32", "None", 33555432));
        let root = Node::Section(
            Section::new("bank")
                .attr("NUM_INST", 1)
                .child(Section::new("absfxlist"))
                .child(Section::new("samples").child(Item::new(96, "kick [0]", body))),
        );

        let expected = "\
<?xml version='1.0' encoding='utf-8'?>
<bank NUM_INST=\"1\">
  <absfxlist />
  <samples>
    <item address=\"96\" name=\"kick [0]\">
      <struct name=\"ABSample\">
        <!-- Bitfield layout -->
        <field name=\"Bitfield\" datatype=\"uint32\" ispointer=\"0\" isarray=\"0\" meaning=\"None\" value=\"33555432\" />
      </struct>
    </item>
  </samples>
</bank>
";
        assert_eq!(to_xml_string(&root), expected);
    }

    #[test]
    fn test_multiline_comment() {
        let root = Node::Section(
            Section::new("s").child(StructNode::new("T").comment("first\nsecond -- third")),
        );
        let xml = to_xml_string(&root);
        assert!(xml.contains("    <!-- first\n      second - - third\n    -->\n"));
    }
}
