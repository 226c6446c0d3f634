//! Code generation integration tests
//!
//! Golden comparisons of complete generated C# units.

use nova::codegen::GeneratorOptions;
use nova::{translate, CodegenError, CSharpGenerator, Stage, TranslateOptions};

fn generate(source: &str) -> String {
    match translate("unit", source, &TranslateOptions::default()) {
        Ok(translation) => translation.generated.source,
        Err(diagnostics) => panic!("translation failed: {:?}", diagnostics),
    }
}

#[test]
fn test_golden_console_program() {
    let source = r#"
have x = 1
{
    have x = 2
    put(x)
}
put(x)
when (x == 1) { put("a") } otherwise { put("b") }
pause()
"#;
    let expected = r#"using System;

namespace Nova.Generated
{
    public static class NovaProgram
    {
        [STAThread]
        public static void Main(string[] args)
        {
            double x_0 = 1.0;
            {
                double x_1 = 2.0;
                Console.WriteLine(x_1);
            }
            Console.WriteLine(x_0);
            if (x_0 == 1.0)
            {
                Console.WriteLine("a");
            }
            else
            {
                Console.WriteLine("b");
            }
            Console.ReadKey(true);
        }
    }
}
"#;
    assert_eq!(generate(source), expected);
}

#[test]
fn test_golden_window_program() {
    let source = r#"
have greeting = "Hello"
window Main {
    title = greeting
    width = 300
    height = 120
    set_icon("app.ico")
    label hi { text = greeting }
    button ok {
        text = "OK"
        on_click {
            ui_message(greeting + "!")
            exit()
        }
    }
}
"#;
    let expected = r#"using System;
using System.Drawing;
using System.Windows.Forms;

namespace Nova.Generated
{
    public static class NovaProgram
    {
        [STAThread]
        public static void Main(string[] args)
        {
            Application.EnableVisualStyles();
            Application.SetCompatibleTextRenderingDefault(false);
            string greeting_0 = "Hello";
            Application.Run(new Main(greeting_0));
        }
    }

    public class Main : Form
    {
        public Main(string greeting_0)
        {
            Text = greeting_0;
            ClientSize = new Size(300, 120);
            using (var iconStream = typeof(Main).Assembly.GetManifestResourceStream("Main.app.ico"))
            {
                if (iconStream != null)
                {
                    Icon = new Icon(iconStream);
                }
            }
            var hi_ctl = new Label();
            hi_ctl.Text = greeting_0;
            hi_ctl.AutoSize = true;
            hi_ctl.Location = new Point(12, 12);
            Controls.Add(hi_ctl);
            var ok_ctl = new Button();
            ok_ctl.Text = "OK";
            ok_ctl.Size = new Size(100, 30);
            ok_ctl.Location = new Point(12, 48);
            ok_ctl.Click += (sender, e) =>
            {
                MessageBox.Show(greeting_0 + "!");
                Application.Exit();
            };
            Controls.Add(ok_ctl);
        }
    }
}
"#;
    assert_eq!(generate(source), expected);
}

#[test]
fn test_generation_is_byte_identical_across_runs() {
    let source = "have n = 2\nwhile (n > 0) { n = n - 1 put(n) }\nwindow W { textbox t { on_change { put(n) } } }";
    assert_eq!(generate(source), generate(source));
}

#[test]
fn test_source_map_points_back_to_statements() {
    let translation = translate("unit", "have a = 1\n\nput(a)", &TranslateOptions::default()).unwrap();
    let source = &translation.generated.source;
    let map = &translation.generated.source_map;

    let line_of = |needle: &str| source.lines().position(|l| l.contains(needle)).unwrap() + 1;
    assert_eq!(map.source_line(line_of("double a_0")), Some(1));
    assert_eq!(map.source_line(line_of("Console.WriteLine(a_0)")), Some(3));
    assert_eq!(map.source_line(line_of("namespace")), None);
}

#[test]
fn test_reserved_window_name_is_a_generation_error() {
    let diagnostics = translate("unit", "window MessageBox { }", &TranslateOptions::default()).unwrap_err();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].stage, Stage::Generate);
    assert_eq!(diagnostics[0].line, 1);

    let options = TranslateOptions {
        generator: GeneratorOptions { class_name: "App".to_string(), namespace: None },
        ..TranslateOptions::default()
    };
    let program = translate("unit", "put(1)", &options).unwrap().program;
    let err = CSharpGenerator::new(GeneratorOptions { class_name: "W".to_string(), namespace: None })
        .generate(&translate("unit", "window W { }", &options).unwrap().program)
        .unwrap_err();
    assert!(matches!(err, CodegenError::ReservedName { .. }));
    assert!(CSharpGenerator::new(options.generator.clone()).generate(&program).is_ok());
}

#[test]
fn test_user_calls_pass_through() {
    let code = generate("have n = 3\nlog_value(n, \"units\")\nwindow W { button b { text = \"x\" on_click { log_value(n, \"click\") } } }");
    assert!(code.contains("            log_value(n_0, \"units\");\n"));
    assert!(code.contains("NovaProgram.log_value(n_0, \"click\");"));
}
