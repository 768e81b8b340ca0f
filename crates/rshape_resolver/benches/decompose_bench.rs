use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rshape_parser::DeclarationParser;
use rshape_resolver::{MemoryFileSystem, TypeResolutionContext};

// Props spread over two modules, exercising heritage, utility types, mapped
// types and template keys.
const TYPES_SOURCE: &str = r#"
export type Size = 'small' | 'medium' | 'large'
export type Variant = `${Size}-${'solid' | 'outline'}`

export interface BaseProps {
    id: string
    disabled?: boolean
    size?: Size
}

export interface NativeProps {
    onClick: (e: MouseEvent) => void
    onFocus: (e: FocusEvent) => void
    tabIndex: number
    title: string
}

export type Handlers<T> = {
    [K in keyof T as `on${Capitalize<string & K>}`]?: (value: T[K]) => void
}
"#;

const MAIN_SOURCE: &str = r#"
import type { BaseProps, NativeProps, Variant, Handlers } from './types'

interface Model { value: string; checked: boolean; count: number }

export interface ButtonProps extends BaseProps, Omit<NativeProps, 'onClick'> {
    label: string
    variant: Variant
    icon?: () => VNode
    items: Array<{ key: string }>
    meta: Record<Variant, number>
}

export type Props = ButtonProps & Partial<Model> & Handlers<Model>
"#;

fn bench_decompose_props(c: &mut Criterion) {
    c.bench_function("decompose_props_cold", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let fs = MemoryFileSystem::with_files([("/src/types.ts", TYPES_SOURCE), ("/src/main.ts", MAIN_SOURCE)]);
            let ctx = TypeResolutionContext::new(&arena, fs, DeclarationParser::new());
            let scope = ctx.file_scope("/src/main.ts");
            if let Ok(shape) = ctx.decompose_named(&scope, "Props") {
                for property in shape.props.values() {
                    black_box(ctx.infer_property_tags(property));
                }
            }
        });
    });

    c.bench_function("decompose_props_warm", |b| {
        let arena = Bump::new();
        let fs = MemoryFileSystem::with_files([("/src/types.ts", TYPES_SOURCE), ("/src/main.ts", MAIN_SOURCE)]);
        let ctx = TypeResolutionContext::new(&arena, fs, DeclarationParser::new());
        let scope = ctx.file_scope("/src/main.ts");
        b.iter(|| black_box(ctx.decompose_named(&scope, black_box("Props")).map(|shape| shape.props.len())));
    });
}

criterion_group!(benches, bench_decompose_props);
criterion_main!(benches);
